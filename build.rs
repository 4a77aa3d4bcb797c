fn main() {
    // Emits the esp-idf link/cfg directives when building for the espidf
    // target; prints nothing on a plain host build.
    embuild::espidf::sysenv::output();
}
