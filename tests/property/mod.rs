pub mod session_properties;
