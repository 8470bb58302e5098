fn main() {
    // ESP-IDF environment propagation only applies to the firmware build.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
