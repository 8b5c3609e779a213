pub mod color;
pub mod f32;
pub mod io;
pub mod resize;
pub mod traits;

pub use self::color::ColorImage;
pub use self::f32::ImageF32;
pub use self::traits::{ImageView, ImageViewMut};
