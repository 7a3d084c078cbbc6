mod smart_image_view;

pub use smart_image_view::{SmartImageView, SmartImageViewStyle};
