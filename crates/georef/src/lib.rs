#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use georef_linalg as linalg;

#[doc(inline)]
pub use georef_optim as optim;

#[doc(inline)]
pub use georef_proj as proj;

#[doc(inline)]
pub use georef_transform as transform;
