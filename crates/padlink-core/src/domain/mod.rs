//! Domain entities for padlink.
//!
//! Pure data types and the rules that keep them valid.  Nothing in here
//! touches a device node; the application layer of the `padlink` crate fills
//! these types from a live device and hands them to the virtual device
//! factory.

/// Capability descriptor and axis calibration metadata.
pub mod capability;

/// Bus/vendor/product/version identity tuple.
pub mod identity;

/// Forwarding-loop states and timing.
pub mod link;
