pub mod atomic_file;
pub mod get_ip;
