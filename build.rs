fn main() {
    if let Ok(target) = std::env::var("TARGET") {
        println!("cargo:rustc-env=GT_TARGET={}", target);
    }

    println!("cargo:rerun-if-env-changed=GT_BUILD");
    println!("cargo:rerun-if-env-changed=GT_COMMIT");
    println!("cargo:rerun-if-env-changed=GT_BRANCH");
}
