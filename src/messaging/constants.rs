pub const MESSAGING_COMPONENT_NAME: &str = "messaging";
