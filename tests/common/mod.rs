#![allow(dead_code)]
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Word list written to a temporary file that is removed on drop
pub struct TestWordList {
    file: NamedTempFile,
}

impl TestWordList {
    pub fn new(lines: &[&str]) -> Self {
        let mut file =
            NamedTempFile::new().expect("Failed to create temp word list");
        for line in lines {
            writeln!(file, "{line}").expect("Failed to write word list");
        }
        file.flush().expect("Failed to flush word list");
        Self { file }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

// Helper function to generate consistent test data
pub fn generate_test_items(count: usize) -> Vec<Vec<u8>> {
    (0..count)
        .map(|i| format!("test_item_{:06}", i).into_bytes())
        .collect()
}

// Items guaranteed to be disjoint from `generate_test_items`
pub fn generate_absent_items(count: usize) -> Vec<Vec<u8>> {
    (0..count)
        .map(|i| format!("absent_item_{:06}", i).into_bytes())
        .collect()
}

pub fn generate_words(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("word{:05}", i)).collect()
}
