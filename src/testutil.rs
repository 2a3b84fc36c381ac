//! Helpers for building throwaway repositories in tests.

use tempfile::TempDir;

pub fn sig() -> git2::Signature<'static> {
    let when = git2::Time::new(1_700_000_000, 0);
    git2::Signature::new("Test User", "test@example.com", &when).unwrap()
}

pub fn init_repo() -> (TempDir, git2::Repository) {
    let dir = TempDir::new().unwrap();
    let repo = git2::Repository::init(dir.path()).unwrap();
    (dir, repo)
}

/// Commit a single-file change on top of `parents`, optionally moving
/// `update_ref`. The tree is the first parent's tree plus the file.
pub fn commit_file(
    repo: &git2::Repository,
    update_ref: Option<&str>,
    file: &str,
    content: &str,
    message: &str,
    parents: &[git2::Oid],
) -> git2::Oid {
    let blob = repo.blob(content.as_bytes()).unwrap();
    let base_tree = parents
        .first()
        .map(|p| repo.find_commit(*p).unwrap().tree().unwrap());
    let mut builder = repo.treebuilder(base_tree.as_ref()).unwrap();
    builder.insert(file, blob, 0o100644).unwrap();
    let tree = repo.find_tree(builder.write().unwrap()).unwrap();

    let parent_commits: Vec<git2::Commit<'_>> = parents
        .iter()
        .map(|p| repo.find_commit(*p).unwrap())
        .collect();
    let parent_refs: Vec<&git2::Commit<'_>> = parent_commits.iter().collect();
    repo.commit(update_ref, &sig(), &sig(), message, &tree, &parent_refs)
        .unwrap()
}

/// Entry names of a tree, for asserting merge results.
pub fn tree_files(repo: &git2::Repository, commit: git2::Oid) -> Vec<String> {
    let tree = repo.find_commit(commit).unwrap().tree().unwrap();
    tree.iter()
        .map(|entry| entry.name().unwrap().to_string())
        .collect()
}
