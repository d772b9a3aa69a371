//! Router block placement file output.
//!
//! One line per router block, in block order:
//!
//! ```text
//! <block name> <layer> <physical router id>
//! ```

use noc_common::Interner;
use noc_model::{NocStorage, RouterBlocks};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Writes the placement of every router block to `writer`.
pub fn write_noc_placement<W: Write>(
    writer: &mut W,
    blocks: &RouterBlocks,
    noc: &NocStorage,
    interner: &Interner,
) -> io::Result<()> {
    for block in blocks.iter() {
        let name = interner.try_resolve(block.name).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("router block {} has no name", block.id),
            )
        })?;
        let router = noc.router(block.router);
        writeln!(writer, "{name} {} {}", router.loc.layer, router.user_id)?;
    }
    Ok(())
}

/// Writes the placement file to `path`, replacing any existing file.
pub fn write_noc_placement_file(
    path: &Path,
    blocks: &RouterBlocks,
    noc: &NocStorage,
    interner: &Interner,
) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_noc_placement(&mut writer, blocks, noc, interner)?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use noc_model::{GridLoc, MeshParams, NocRouterId};

    #[test]
    fn lines_follow_block_order() {
        let noc = NocStorage::mesh(3, 1, MeshParams::default());
        let interner = Interner::new();
        let mut blocks = RouterBlocks::new(noc.router_count());
        blocks
            .add_block(interner.get_or_intern("noc_router_b"), NocRouterId::from_raw(2))
            .unwrap();
        blocks
            .add_block(interner.get_or_intern("noc_router_a"), NocRouterId::from_raw(0))
            .unwrap();

        let mut out = Vec::new();
        write_noc_placement(&mut out, &blocks, &noc, &interner).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "noc_router_b 0 2\nnoc_router_a 0 0\n"
        );
    }

    #[test]
    fn writes_user_ids_and_layers() {
        let mut noc = NocStorage::new();
        noc.add_router(40, GridLoc { x: 0, y: 0, layer: 1 }, 0.0).unwrap();
        let interner = Interner::new();
        let mut blocks = RouterBlocks::new(noc.router_count());
        blocks
            .add_block(interner.get_or_intern("top"), NocRouterId::from_raw(0))
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("design.noc.place");
        write_noc_placement_file(&path, &blocks, &noc, &interner).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "top 1 40\n");
    }

    #[test]
    fn unknown_name_is_an_error() {
        let noc = NocStorage::mesh(1, 1, MeshParams::default());
        let mut blocks = RouterBlocks::new(1);
        blocks
            .add_block(noc_common::Ident::from_raw(5), NocRouterId::from_raw(0))
            .unwrap();
        let err = write_noc_placement(&mut Vec::new(), &blocks, &noc, &Interner::new()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
