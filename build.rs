#![forbid(unsafe_code)]

fn main() {
    // Build information is best effort; a source tarball has no git metadata.
    let unknown = |_| "unknown".to_string();
    let branch = build_data::get_git_branch().unwrap_or_else(unknown);
    let commit = build_data::get_git_commit_short().unwrap_or_else(unknown);
    let dirty = build_data::get_git_dirty().map(|d| d.to_string()).unwrap_or_else(unknown);
    let source_ts = build_data::get_source_time()
        .map(build_data::format_timestamp)
        .unwrap_or_else(unknown);
    let rustc = build_data::get_rustc_version().unwrap_or_else(unknown);

    println!("cargo:rustc-env=GIT_BRANCH={}", branch);
    println!("cargo:rustc-env=GIT_COMMIT_SHORT={}", commit);
    println!("cargo:rustc-env=GIT_DIRTY={}", dirty);
    println!("cargo:rustc-env=SOURCE_TIMESTAMP={}", source_ts);
    println!("cargo:rustc-env=RUSTC_VERSION={}", rustc);
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=templates/edition.html");
}
