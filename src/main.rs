fn main() {
    if let Err(err) = dqchat::cli::main() {
        eprintln!("❌ {err}");
        std::process::exit(1);
    }
}
