//! Testing utilities and harness for the TypeClient render bridge

pub mod testing;

pub use testing::*;

pub mod prelude {
    pub use crate::testing::*;
}
