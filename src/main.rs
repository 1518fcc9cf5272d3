fn main() {
    if let Err(err) = unused_styles::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
