pub fn main() {
    std::process::exit(jugadb_cli::run_with_args(std::env::args_os()));
}
