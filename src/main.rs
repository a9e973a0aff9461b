fn main() {
    if let Err(err) = worktally_lib::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
