//! Generation benchmarks over a synthetic registry.
//!
//! Each feature adds a handle, a handle-bearing struct, an enum, a 64-bit
//! flags type and a command using all of them; each extension aliases the
//! previous feature's entities and requires the previous extension.

use apigen::ir::{
    CommandDef, EntityKind, EnumDef, EnumValue, Extension, Feature, FlagsDef, HandleDef, Member,
};
use apigen::{BackendKind, GeneratorConfig, Registry, generate, generate_all};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

fn synthetic_registry(n: u32) -> Registry {
    let mut builder = Registry::builder();
    for i in 0..n {
        let handle = format!("VkObject{i}");
        let info = format!("VkObject{i}Info");
        let bits = format!("VkObject{i}FlagBits");
        let flags = format!("VkObject{i}Flags");
        let command = format!("vkUseObject{i}");
        builder = builder
            .handle(&handle, HandleDef::default())
            .structure(
                &info,
                vec![
                    Member::value("object", &handle),
                    Member::value("flags", &flags),
                ],
            )
            .enum_def(
                &bits,
                EnumDef {
                    values: vec![EnumValue::bit("LOW", 0), EnumValue::bit("HIGH", 40)],
                },
            )
            .flags(
                &flags,
                FlagsDef {
                    bits_enum: Some(bits.clone()),
                    base_type: Some("VkFlags64".into()),
                },
            )
            .command_def(
                &command,
                CommandDef {
                    params: vec![
                        Member::value("object", &handle),
                        Member::pointer("pInfo", &info).with_const(),
                    ],
                    return_type: None,
                },
            )
            .alias(EntityKind::Command, &format!("{command}KHR"), &command)
            .feature(Feature::new(
                format!("v{i}"),
                i,
                &[
                    handle.as_str(),
                    info.as_str(),
                    bits.as_str(),
                    flags.as_str(),
                    command.as_str(),
                ],
            ));

        let alias = format!("{command}KHR");
        let mut extension =
            Extension::new(format!("ext{i:05}"), &[alias.as_str()]).with_protect(format!("EXT{i}"));
        if i > 0 {
            let previous = format!("ext{:05}", i - 1);
            extension = extension.requires(&[previous.as_str()]);
        }
        builder = builder.extension(extension);
    }
    builder.build().expect("synthetic registry is valid")
}

fn bench_backends(c: &mut Criterion) {
    let registry = synthetic_registry(500);
    let config = GeneratorConfig::default();
    let domain = config.domain(&registry);
    let options = config.output_options();

    let mut group = c.benchmark_group("generate/backend");
    for kind in BackendKind::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(kind), &kind, |b, kind| {
            b.iter(|| black_box(generate(&domain, kind.create(&config), &options).unwrap()));
        });
    }
    group.finish();
}

fn bench_scaling(c: &mut Criterion) {
    let config = GeneratorConfig::default();
    let options = config.output_options();
    let mut group = c.benchmark_group("generate/all_backends");
    for n in [50, 500, 2000] {
        let registry = synthetic_registry(n);
        let domain = config.domain(&registry);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                let backends = BackendKind::ALL.iter().map(|k| k.create(&config)).collect();
                black_box(generate_all(&domain, backends, &options))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_backends, bench_scaling);
criterion_main!(benches);
