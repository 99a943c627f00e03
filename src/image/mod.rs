pub mod f64;
pub mod io;
pub mod mask;
pub mod traits;

pub use self::f64::ImageF64;
pub use self::mask::Mask;
pub use self::traits::{ImageView, Rows};
