//! Host architecture and OS in Go's naming

/// Map a Rust architecture name to `GOARCH`
pub fn go_arch(arch: &str) -> &str {
    match arch {
        "x86_64" => "amd64",
        "x86" => "386",
        "aarch64" => "arm64",
        "powerpc64" if cfg!(target_endian = "little") => "ppc64le",
        "loongarch64" => "loong64",
        other => other,
    }
}

/// Map a Rust OS name to `GOOS`
pub fn go_os(os: &str) -> &str {
    match os {
        "macos" => "darwin",
        other => other,
    }
}

/// `GOARCH` of the machine running gostage
pub fn host_goarch() -> &'static str {
    go_arch(std::env::consts::ARCH)
}

/// `GOOS` of the machine running gostage
pub fn host_goos() -> &'static str {
    go_os(std::env::consts::OS)
}
