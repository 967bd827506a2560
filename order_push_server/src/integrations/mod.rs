pub mod fcm;
pub mod ghazaresan;
