fn main() {
    hilo_edge::cli::run();
}
