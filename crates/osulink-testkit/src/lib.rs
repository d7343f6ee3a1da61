//! # osulink Testkit
//!
//! Testing utilities for osulink.
//!
//! ## Overview
//!
//! - **Fixtures**: a memory store and platform wired to a bot, plus builders
//!   for linked users and `/permissions` invocations
//! - **Generators**: proptest strategies for users, grant lists and Discord ids
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use osulink_testkit::generators::{user_from_params, UserParams};
//!
//! proptest! {
//!     #[test]
//!     fn grants_never_repeat(params: UserParams) {
//!         let user = user_from_params(&params);
//!         let mut seen = std::collections::HashSet::new();
//!         prop_assert!(user.permissions().iter().all(|g| seen.insert(g)));
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use osulink::commands::permissions::Action;
//! use osulink_testkit::fixtures::{discord_invocation, TestFixture, ADMIN_ID};
//!
//! async fn example() {
//!     let fixture = TestFixture::new();
//!     let bot = fixture.start().await;
//!     fixture.linked_user("42", 7, "whitecat").await;
//!
//!     let reply = bot
//!         .handle_interaction(&discord_invocation(ADMIN_ID, Action::Add, "42", "PING"))
//!         .await;
//!     assert!(reply.is_some());
//! }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{discord_invocation, osu_invocation, pushed_ids, TestFixture, ADMIN_ID};
pub use generators::{population, user_from_params, UserParams};
