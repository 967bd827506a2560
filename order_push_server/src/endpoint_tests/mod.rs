mod helpers;
mod registration;
