//! End-to-end shell contracts: command lines in, rendered output out,
//! state surviving across sessions through the snapshot file.

use inofs::session::FsSession;
use inofs::shell::Shell;
use inofs::store::persistence::SnapshotFile;
use inofs::types::ROOT_ID;
use tempfile::TempDir;

fn shell_at(dir: &TempDir) -> Shell {
    let snapshot = SnapshotFile::new(dir.path().join("filesystem.dat"));
    let session = FsSession::with_store(snapshot.load().unwrap());
    Shell::new(session, snapshot)
}

#[test]
fn find_reports_files_created_in_subdirectories() {
    let dir = TempDir::new().unwrap();
    let mut shell = shell_at(&dir);

    shell.execute("mkdir docs");
    shell.execute("cd docs");
    shell.execute("touch report.txt");
    shell.execute("cd ..");

    assert_eq!(shell.execute("find report").output, "/docs/report.txt");
}

#[test]
fn chmod_validates_mode_length_and_keeps_prior_permissions() {
    let dir = TempDir::new().unwrap();
    let mut shell = shell_at(&dir);

    shell.execute("mkdir docs");
    shell.execute("cd docs");
    shell.execute("touch report.txt");

    assert_eq!(
        shell.execute("chmod report.txt rwx").output,
        "permissions of 'report.txt' changed to 'rwx'"
    );
    assert_eq!(
        shell.execute("chmod report.txt rwxrwxrwxrwx").output,
        "chmod: invalid permission format 'rwxrwxrwxrwx'"
    );

    let docs = shell.session().cwd();
    let entry = shell
        .session()
        .store()
        .child_by_name(docs, "report.txt")
        .unwrap();
    assert_eq!(entry.permissions, "rwx");
}

#[test]
fn state_survives_between_sessions_and_the_cursor_does_not() {
    let dir = TempDir::new().unwrap();

    let mut first = shell_at(&dir);
    first.execute("mkdir projects");
    first.execute("cd projects");
    first.execute("touch plan.txt");
    assert!(first.execute("exit").quit);

    let mut second = shell_at(&dir);
    // The cursor restarts at the root regardless of where `exit` happened.
    assert_eq!(second.execute("pwd").output, "/");
    assert_eq!(
        second.execute("find plan").output,
        "/projects/plan.txt"
    );
    assert!(second
        .session()
        .store()
        .child_by_name(ROOT_ID, "projects")
        .is_some());
}

#[test]
fn rm_of_a_populated_directory_requires_emptying_it_first() {
    let dir = TempDir::new().unwrap();
    let mut shell = shell_at(&dir);

    shell.execute("mkdir build");
    shell.execute("cd build");
    shell.execute("touch out.bin");
    shell.execute("cd ..");

    assert_eq!(
        shell.execute("rm build").output,
        "rm: 'build': directory not empty"
    );
    shell.execute("cd build");
    assert_eq!(shell.execute("rm out.bin").output, "removed 'out.bin'");
    shell.execute("cd ..");
    assert_eq!(shell.execute("rm build").output, "removed 'build'");
    assert_eq!(shell.session().store().len(), 1);
}
