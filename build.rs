//! Build script which records information about the build for the run metadata.
fn main() -> std::io::Result<()> {
    built::write_built_file()
}
