mod images;
mod pages;
mod pictures;
mod upload;

pub(crate) use images::list_images;
pub(crate) use pages::{favicon, index, slideshow};
pub(crate) use pictures::serve_picture;
pub(crate) use upload::upload;
