//! Chainway UHF reader adapters.
//!
//! Two modules are supported: the R3 USB handheld and the UR4 network
//! reader. Both are driven by [`ChainwayReader`], parameterized by the SDK
//! binding and a model type:
//!
//! ```text
//! ChainwayR3<S: UsbSdk>      = ChainwayReader<S, R3>
//! ChainwayUr4<S: NetworkSdk> = ChainwayReader<S, Ur4>
//! ```
//!
//! The vendor library is reached only through the traits in [`sdk`]; a
//! binding loads it and forwards calls. Creating a reader registers the
//! SDK's shared libraries with the given [`uhfkit_hardware::NativeLibraries`].

pub mod error;
pub mod reader;
pub mod sdk;
pub mod tables;

pub use error::ChainwayError;
pub use reader::{
    ChainwayModel, ChainwayR3, ChainwayReader, ChainwayUr4, DutyCycle, NATIVE_LIBRARIES, R3,
    ReadMode, Ur4,
};
pub use sdk::{ChainwaySdk, NetworkSdk, UsbSdk};
pub use tables::{Protocol, RfLink, frequency_masks};
