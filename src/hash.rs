use md5::Md5;
use sha2::{Digest, Sha256};

/// Plain-text integrity report with MD5 and SHA-256 digests of `content`.
pub fn integrity_report(filename: &str, content: &[u8]) -> String {
    let md5 = hex::encode(Md5::digest(content));
    let sha256 = hex::encode(Sha256::digest(content));

    format!(
        "--- FILE INTEGRITY REPORT ---\nFilename: {}\nSize: {} bytes\n\nMD5:\n{}\n\nSHA-256:\n{}",
        filename,
        content.len(),
        md5,
        sha256
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_for_known_input() {
        let report = integrity_report("hello.txt", b"hello");
        assert_eq!(
            report,
            "--- FILE INTEGRITY REPORT ---\n\
             Filename: hello.txt\n\
             Size: 5 bytes\n\n\
             MD5:\n5d41402abc4b2a76b9719d911017c592\n\n\
             SHA-256:\n2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }
}
