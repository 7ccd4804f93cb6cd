fn main() {
    if std::env::var("CARGO_CFG_TARGET_OS").unwrap() == "windows" {
        let mut res = winresource::WindowsResource::new();
        res.set("FileDescription", "Python launcher with UTF-8 standard streams");
        res.set("ProductName", "python3-utf8");
        res.compile().unwrap();
    }
}
