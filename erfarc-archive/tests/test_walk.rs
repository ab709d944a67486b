use erfarc_archive::{
    ArchiveKind, ErfArchive, ErfVersion, ErfWriter, Lister, MetaFile, NameFilter, ResourceNode,
    Visitor, WalkStats, walk,
};
use erfarc_core::{ResourceType, Result};
use std::io::Cursor;
use std::path::Path;

fn build_archive(kind: ArchiveKind, files: &[(&str, ResourceType, &[u8])]) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut writer = ErfWriter::new(&mut buf, kind, ErfVersion::V1_0);
    for (key, res_type, data) in files {
        writer.add_resource(key, *res_type, data).unwrap();
    }
    writer.finish().unwrap();
    buf
}

fn tree(res_type: ResourceType, data: Vec<u8>) -> ResourceNode {
    let size = data.len() as u64;
    ResourceNode::build(res_type, "root", size, &mut Cursor::new(data)).unwrap()
}

/// root.mod -> child.erf -> a.txt, b.txt, c.txt
fn nested() -> ResourceNode {
    let child = build_archive(
        ArchiveKind::Erf,
        &[
            ("a", ResourceType::TXT, b"1"),
            ("b", ResourceType::TXT, b"22"),
            ("c", ResourceType::TXT, b"333"),
        ],
    );
    let root = build_archive(ArchiveKind::Mod, &[("child", ResourceType::ERF, &child)]);
    tree(ResourceType::MOD, root)
}

#[derive(Default)]
struct Paths {
    resources: Vec<String>,
    metas: Vec<String>,
}

impl Visitor for Paths {
    fn visit_resource(&mut self, _: &ResourceNode, path: &str, _: &Path) -> Result<()> {
        self.resources.push(path.to_string());
        Ok(())
    }

    fn visit_meta(&mut self, _: &ResourceNode, _: &MetaFile, path: &str, _: &Path) -> Result<()> {
        self.metas.push(path.to_string());
        Ok(())
    }
}

fn run(root: &ResourceNode, depth: i32, filter: &NameFilter) -> (WalkStats, Paths) {
    let mut paths = Paths::default();
    let stats = walk(root, depth, filter, Path::new("out"), &mut paths).unwrap();
    (stats, paths)
}

#[test]
fn test_two_entry_scenario() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let data = build_archive(
        ArchiveKind::Erf,
        &[
            ("ALPHA", ResourceType::TXT, b"hello"),
            ("BETA", ResourceType::TXT, b"abc"),
        ],
    );

    let archive = ErfArchive::read(&mut Cursor::new(&data), data.len() as u64)?;
    assert_eq!(archive.header.entry_count, 2);
    assert_eq!(archive.entries[0].key, "ALPHA");
    assert_eq!(archive.entries[0].size, 5);
    assert_eq!(archive.entries[1].key, "BETA");
    assert_eq!(archive.entries[1].size, 3);

    let root = tree(ResourceType::ERF, data);
    let (stats, paths) = run(&root, -1, &NameFilter::all());
    // The top node is counted with its own size; its two entries add 8 bytes.
    assert_eq!(stats.count, 3);
    assert_eq!(stats.bytes - root.size, 8);
    assert_eq!(paths.resources, ["ALPHA.txt", "BETA.txt"]);
    assert_eq!(paths.metas, ["root.erf.xml"]);
    Ok(())
}

#[test]
fn test_depth_collapse() {
    let root = nested();
    let all = NameFilter::all();

    let (stats, paths) = run(&root, 0, &all);
    assert_eq!(stats.count, 1);
    assert!(paths.resources.is_empty());
    assert!(paths.metas.is_empty());

    let (stats, paths) = run(&root, 1, &all);
    assert_eq!(stats.count, 2);
    assert_eq!(paths.resources, ["child.erf"]);
    assert_eq!(paths.metas, ["root.mod.xml"]);

    let (stats, paths) = run(&root, -1, &all);
    assert_eq!(stats.count, 5);
    assert_eq!(stats.meta_count, 2);
    assert_eq!(
        paths.resources,
        ["child.erf/a.txt", "child.erf/b.txt", "child.erf/c.txt", "child.erf"]
    );
    assert_eq!(paths.metas, ["root.mod.xml", "child.erf.xml"]);
    assert_eq!(root.total_nodes(), 5);
}

#[test]
fn test_depth_collapse_bytes() {
    let root = nested();
    let child = &root.children()[0];

    let (stats, _) = run(&root, 1, &NameFilter::all());
    assert_eq!(stats.bytes, root.size + child.size);

    let (stats, _) = run(&root, -1, &NameFilter::all());
    assert_eq!(stats.bytes, root.size + child.size + 6);
}

#[test]
fn test_filter_prunes_subtrees() {
    let root = nested();

    // Matches the container but none of its members.
    let filter = NameFilter::new([r"^child\.erf$"]).unwrap();
    let (stats, paths) = run(&root, -1, &filter);
    assert_eq!(stats.count, 2);
    assert_eq!(paths.resources, ["child.erf"]);

    // Members cannot be reached through a pruned parent.
    let filter = NameFilter::new([r"a\.txt$"]).unwrap();
    let (stats, paths) = run(&root, -1, &filter);
    assert_eq!(stats.count, 1);
    assert!(paths.resources.is_empty());

    let filter = NameFilter::new(["^child", "nothing"]).unwrap();
    let (stats, _) = run(&root, -1, &filter);
    assert_eq!(stats.count, 5);
}

#[test]
fn test_filter_excludes_from_listing() {
    let data = build_archive(
        ArchiveKind::Erf,
        &[
            ("ALPHA", ResourceType::TXT, b"hello"),
            ("BETA", ResourceType::TXT, b"abc"),
        ],
    );
    let root = tree(ResourceType::ERF, data);

    let filter = NameFilter::new(["^BETA"]).unwrap();
    let mut lister = Lister::new(Vec::new());
    let stats = walk(&root, -1, &filter, Path::new(""), &mut lister).unwrap();
    assert_eq!(stats.count, 2);
    assert_eq!(stats.bytes - root.size, 3);

    let out = String::from_utf8(lister.into_inner()).unwrap();
    assert_eq!(out.lines().count(), 1);
    assert!(out.contains("BETA.txt"));
}

#[test]
fn test_walk_output_paths() {
    #[derive(Default)]
    struct Outputs(Vec<String>);

    impl Visitor for Outputs {
        fn visit_resource(&mut self, _: &ResourceNode, _: &str, output: &Path) -> Result<()> {
            self.0.push(output.display().to_string());
            Ok(())
        }

        fn visit_meta(&mut self, _: &ResourceNode, _: &MetaFile, _: &str, output: &Path) -> Result<()> {
            self.0.push(output.display().to_string());
            Ok(())
        }
    }

    let root = nested();
    let mut outputs = Outputs::default();
    walk(&root, -1, &NameFilter::all(), Path::new("out"), &mut outputs).unwrap();

    let expected: Vec<String> = [
        "out/root.mod.xml",
        "out/root/child.erf.xml",
        "out/root/child_erf/a.txt",
        "out/root/child_erf/b.txt",
        "out/root/child_erf/c.txt",
        "out/root/child.erf",
    ]
    .iter()
    .map(|p| Path::new(p).display().to_string())
    .collect();
    assert_eq!(outputs.0, expected);
}
