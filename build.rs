fn main() {
    // The include_dir! macro embeds www/ at compile time,
    // but cargo doesn't track non-Rust files automatically.
    println!("cargo:rerun-if-changed=www");
}
