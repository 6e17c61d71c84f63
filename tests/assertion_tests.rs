use anyhow::Result;
use fixtree::assertion::{assert_path_exists, assert_path_is_file};
use fixtree::{TempDir, TempFile};

#[test]
fn assert_path_exists_success() -> Result<()> {
    let temp_file = TempFile::create("fixtree_existing_path")?;
    assert_path_exists(temp_file.path())?;
    Ok(())
}

#[test]
fn assert_path_exists_failure() {
    let error = assert_path_exists("/fixtree_surely_not_existing").expect_err("should have failed");
    assert!(error.to_string().contains("does not exist"));
    assert!(error.to_string().contains("/fixtree_surely_not_existing"));
}

#[test]
fn assert_path_is_file_success() -> Result<()> {
    let temp_file = TempFile::create("fixtree_existing_file")?;
    assert_path_is_file(temp_file.path())?;
    Ok(())
}

#[test]
fn assert_path_is_file_rejects_missing_path() {
    let error =
        assert_path_is_file("/fixtree_surely_not_existing").expect_err("should have failed");
    assert!(error
        .to_string()
        .contains("does not exist but must be a file"));
}

#[test]
fn assert_path_is_file_rejects_directory() -> Result<()> {
    let temp_directory = TempDir::create("fixtree_not_a_file")?;
    let error = assert_path_is_file(temp_directory.path()).expect_err("should have failed");
    assert!(error.to_string().contains("exists but must be a file"));
    Ok(())
}
