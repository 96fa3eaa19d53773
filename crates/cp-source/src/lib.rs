/// Sources de pixels pour cellpaint (images décodées, dossiers).

pub mod folder;
pub mod image;

pub use crate::folder::scan_images;
pub use crate::image::ImageSource;
