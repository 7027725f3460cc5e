fn main() {
    if let Err(err) = schemaviz::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
