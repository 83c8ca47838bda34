fn main() {
    apkgraph::cli::run();
}
