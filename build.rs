fn main() {
    println!("cargo:rerun-if-env-changed=ANCHOR_VERSION");
}
