pub mod get_client_ip;
pub mod image_upload;
pub mod markdown;
