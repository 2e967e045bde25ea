#![forbid(unsafe_code)]

//! Typed, self-validating attribute system.
//!
//! Objects declare their attributes once per class as [`Property`]
//! descriptors collected into a [`ClassSpec`]; every instance is a
//! [`PropObject`] whose reads resolve defaults lazily and whose writes run
//! the declared [`CheckChain`] before storing, so a stored value is always
//! canonical.
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │ PropObject (cloneable handle)              │
//! │   spec: ClassSpec   one per class          │
//! │   values: name → canonical Value           │
//! │   hub: SignalHub<PropEvent>                │
//! └──────────────┬─────────────────────────────┘
//!                │ set("width", raw)
//!                ▼
//!        CheckChain::check(raw) → canonical │ CheckError
//!                │ store + emit update::width
//!                ▼
//!        subscribers (views, undo capture, ...)
//! ```
//!
//! # Invariants
//!
//! - Stored values are canonical: a value read back and set again always
//!   passes unchanged (validation is idempotent).
//! - [`Value::Undefined`] means "never set" and is distinct from an
//!   explicitly assigned [`Value::Null`].
//! - Every successful set emits exactly one [`PropEvent`]; no mutation
//!   path bypasses the hub.

pub mod check;
pub mod container;
pub mod error;
pub mod object;
pub mod property;
pub mod signal;
pub mod value;

pub use check::{
    BoolCheck, Check, CheckChain, ChoiceCheck, FloatCheck, IntCheck, KindCheck, MappingCheck,
    RegexCheck, TextCheck,
};
pub use container::{TypedList, TypedMap};
pub use error::{CheckError, ValidationError};
pub use object::{ClassSpec, ClassSpecBuilder, PropObject};
pub use property::{DefaultRule, Property};
pub use signal::{PropEvent, SignalHub, Subscription};
pub use value::{Value, ValueKind};
