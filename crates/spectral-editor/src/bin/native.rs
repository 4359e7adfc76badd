#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result<()> {
    spectral_editor::native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Use the library's start() function instead.
}
