//! Table level tests: index widths derived from row counts, coded indices crossing the 2-byte
//! threshold and the ordering of sorted tables in a written stream.

use cilmeta::{
    metadata::tables::{
        ConstantRaw, CustomAttributeRaw, FieldLayoutRaw, FieldRaw, InterfaceImplRaw, MemberRefRaw,
        TypeDefRaw,
    },
    prelude::*,
};
use strum::IntoEnumIterator;

fn field_rows(builder: &mut TablesBuilder, count: u32) {
    for _ in 0..count {
        builder.field.add_row(FieldRaw {
            flags: 0x0001,
            name: 0,
            signature: 0,
        });
    }
}

/// A table becomes large once it holds more than 65535 rows
#[test]
fn large_table_threshold() {
    let mut table: RowTable<FieldRaw> = RowTable::new();
    for _ in 0..0xFFFF {
        table.add_row(FieldRaw {
            flags: 0,
            name: 0,
            signature: 0,
        });
    }
    assert_eq!(table.len(), 0xFFFF);
    assert!(!table.is_large());

    let rid = table.add_row(FieldRaw {
        flags: 0,
        name: 0,
        signature: 0,
    });
    assert_eq!(rid, 0x10000);
    assert!(table.is_large());
}

/// Coded indices widen before plain table indices do, depending on their tag width
#[test]
fn coded_index_widths_follow_tag_bits() {
    let heaps = HeapWriter::new();
    let mut builder = TablesBuilder::new(MetadataConfig::default());
    field_rows(&mut builder, 20_000);

    let info = builder.table_info(&heaps);
    assert!(!info.is_large(TableId::Field));
    assert_eq!(info.table_index_bytes(TableId::Field), 2);
    // two tag bits leave 14 bits for the row
    assert_eq!(info.coded_index_bytes(CodedIndexType::HasConstant), 4);
    assert_eq!(info.coded_index_bytes(CodedIndexType::HasFieldMarshal), 2);
    assert_eq!(info.coded_index_bytes(CodedIndexType::HasCustomAttribute), 4);
    assert_eq!(info.coded_index_bytes(CodedIndexType::MemberForwarded), 2);
    assert_eq!(info.coded_index_bytes(CodedIndexType::TypeDefOrRef), 2);
}

/// A field beyond row 65535 is stored and read back through 4-byte references
#[test]
fn references_past_the_small_limit() -> Result<()> {
    let mut heaps = HeapWriter::new();
    let mut builder = TablesBuilder::new(MetadataConfig::compact());
    field_rows(&mut builder, 70_000);

    builder.member_ref.add_row(MemberRefRaw {
        class: CodedIndex::new(TableId::TypeRef, 0),
        name: heaps.intern_string(".ctor")?,
        signature: heaps.intern_blob(&[0x20, 0x00, 0x01])?,
    });
    builder.constant.add_row(ConstantRaw {
        base: 0x08,
        parent: CodedIndex::new(TableId::Field, 70_000),
        value: heaps.intern_blob(&7i32.to_le_bytes())?,
    });
    builder.custom_attribute.add_row(CustomAttributeRaw {
        parent: CodedIndex::new(TableId::Field, 69_999),
        constructor: CodedIndex::new(TableId::MemberRef, 1),
        value: 0,
    });
    builder.field_layout.add_row(FieldLayoutRaw {
        field_offset: 16,
        field: 65_536,
    });

    let info = builder.table_info(&heaps);
    assert!(info.is_large(TableId::Field));
    assert_eq!(info.table_index_bytes(TableId::Field), 4);
    assert_eq!(info.coded_index_bytes(CodedIndexType::HasConstant), 4);
    assert_eq!(info.coded_index_bytes(CodedIndexType::MemberForwarded), 4);

    let stream = builder.write(&heaps)?;
    let header = TablesHeader::from(&stream)?;

    let fields = header.table::<FieldRaw>().unwrap();
    assert_eq!(fields.row_count(), 70_000);
    assert_eq!(fields.get(70_000).unwrap().flags, 0x0001);

    let constant = header.table::<ConstantRaw>().unwrap().get(1).unwrap();
    assert_eq!(constant.parent.tag, TableId::Field);
    assert_eq!(constant.parent.row, 70_000);
    assert_eq!(constant.parent.token, Token::from_parts(TableId::Field, 70_000));

    let attribute = header.table::<CustomAttributeRaw>().unwrap().get(1).unwrap();
    assert_eq!(attribute.parent.row, 69_999);
    assert_eq!(attribute.constructor.tag, TableId::MemberRef);

    let layout = header.table::<FieldLayoutRaw>().unwrap().get(1).unwrap();
    assert_eq!(layout.field, 65_536);
    assert_eq!(layout.field_offset, 16);
    Ok(())
}

/// Every table of every category encodes into a value that decodes to the same reference
#[test]
fn coded_indices_round_trip_in_every_category() -> Result<()> {
    for category in CodedIndexType::iter() {
        for &table in category.tables() {
            let encoded = category.encode(table, 0x1234)?;
            let (decoded, row) = category.decode(encoded)?;
            assert_eq!(row, 0x1234, "{category:?}");
            // CustomAttributeType keeps unused tags, they decode to the table they stand for
            assert_eq!(decoded, table, "{category:?}");
        }
    }
    Ok(())
}

/// Sorted tables are written in key order; equal keys keep the order they were added in
#[test]
fn sorted_tables_are_stable() -> Result<()> {
    let heaps = HeapWriter::new();
    let mut builder = TablesBuilder::new(MetadataConfig::compact());
    field_rows(&mut builder, 4);

    for (row, value) in [(3, 10), (1, 20), (3, 30), (2, 40), (1, 50)] {
        builder.constant.add_row(ConstantRaw {
            base: 0x08,
            parent: CodedIndex::new(TableId::Field, row),
            value,
        });
    }

    let stream = builder.write(&heaps)?;
    let header = TablesHeader::from(&stream)?;
    assert_ne!(header.sorted & TableId::Constant.bit(), 0);

    let order: Vec<(u32, u32)> = header
        .table::<ConstantRaw>()
        .unwrap()
        .iter()
        .map(|row| (row.parent.row, row.value))
        .collect();
    assert_eq!(order, vec![(1, 20), (1, 50), (2, 40), (3, 10), (3, 30)]);
    Ok(())
}

/// A coded index naming a table outside its category cannot be written
#[test]
fn foreign_table_in_coded_index_fails() {
    let heaps = HeapWriter::new();
    let mut builder = TablesBuilder::new(MetadataConfig::default());
    field_rows(&mut builder, 1);
    builder.constant.add_row(ConstantRaw {
        base: 0x08,
        parent: CodedIndex::new(TableId::TypeDef, 1),
        value: 0,
    });

    match builder.write(&heaps) {
        Err(Error::InvalidReference {
            table, category, ..
        }) => {
            assert_eq!(table, TableId::TypeDef);
            assert_eq!(category, "HasConstant");
        }
        other => panic!("expected an invalid reference, got {other:?}"),
    }
}

/// A coded index value wider than its image-wide column is rejected instead of shifting the rows
/// that follow it
#[test]
fn coded_index_wider_than_its_column_fails() {
    let heaps = HeapWriter::new();
    let mut builder = TablesBuilder::new(MetadataConfig::compact());
    builder.type_def.add_row(TypeDefRaw {
        flags: 0,
        type_name: 0,
        type_namespace: 0,
        extends: CodedIndex::null(CodedIndexType::TypeDefOrRef),
        field_list: 1,
        method_list: 1,
    });
    // packs to 0x10000, while one TypeDef row keeps TypeDefOrRef at 2 bytes
    builder.interface_impl.add_row(InterfaceImplRaw {
        class: 1,
        interface: CodedIndex::new(TableId::TypeDef, 0x4000),
    });
    builder.interface_impl.add_row(InterfaceImplRaw {
        class: 1,
        interface: CodedIndex::new(TableId::TypeRef, 1),
    });

    assert_eq!(
        builder.table_info(&heaps).coded_index_bytes(CodedIndexType::TypeDefOrRef),
        2
    );
    match builder.write(&heaps) {
        Err(Error::InvalidReference { table, row, .. }) => {
            assert_eq!(table, TableId::TypeDef);
            assert_eq!(row, 0x4000);
        }
        other => panic!("expected an invalid reference, got {other:?}"),
    }
}

/// The largest value a 2-byte coded index column holds is written and read back unchanged
#[test]
fn coded_index_at_the_column_limit() -> Result<()> {
    let heaps = HeapWriter::new();
    let mut builder = TablesBuilder::new(MetadataConfig::compact());
    builder.type_def.add_row(TypeDefRaw {
        flags: 0,
        type_name: 0,
        type_namespace: 0,
        extends: CodedIndex::null(CodedIndexType::TypeDefOrRef),
        field_list: 1,
        method_list: 1,
    });
    builder.interface_impl.add_row(InterfaceImplRaw {
        class: 1,
        interface: CodedIndex::new(TableId::TypeSpec, 0x3FFF),
    });
    builder.interface_impl.add_row(InterfaceImplRaw {
        class: 1,
        interface: CodedIndex::new(TableId::TypeRef, 1),
    });

    let stream = builder.write(&heaps)?;
    let header = TablesHeader::from(&stream)?;
    let rows: Vec<CodedIndex> = header
        .table::<InterfaceImplRaw>()
        .unwrap()
        .iter()
        .map(|row| row.interface)
        .collect();
    assert_eq!(
        rows,
        vec![
            CodedIndex::new(TableId::TypeSpec, 0x3FFF),
            CodedIndex::new(TableId::TypeRef, 1),
        ]
    );
    Ok(())
}
