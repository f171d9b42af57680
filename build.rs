use std::process::Command;

fn main() {
    // 获取 git 版本信息
    let git_hash = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|hash| hash.trim().to_string())
        .filter(|hash| !hash.is_empty())
        .unwrap_or_else(|| "unknown".to_string());

    // 将版本信息传递给编译器
    println!("cargo:rustc-env=GIT_HASH={}", git_hash);

    // the translation script needs a python interpreter at runtime
    let python_check = Command::new("python")
        .arg("--version")
        .output();

    if python_check.is_err() {
        println!("cargo:warning=python not found in PATH, uploads will fail until TRANSLANOVA_INTERPRETER points at one");
    }
}
