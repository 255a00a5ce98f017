//! Integration tests for apigen.

use apigen::compose::Include;
use apigen::config::BlacklistConfig;
use apigen::error::{BlockKind, Error};
use apigen::input::parse_registry;
use apigen::ir::{Entity, EntityKind, EnumDef, EnumValue, Extension, Feature, FlagsDef, Member};
use apigen::traits::Block;
use apigen::{
    Artifact, ArtifactKind, Backend, BackendKind, Domain, GeneratorConfig, Registry, generate,
    generate_all,
};
use std::sync::{Arc, Mutex};

fn load_fixture(name: &str) -> serde_json::Value {
    let path = format!("tests/fixtures/{}.json", name);
    let content =
        std::fs::read_to_string(&path).unwrap_or_else(|_| panic!("fixture {} not found", name));
    serde_json::from_str(&content).expect("invalid JSON")
}

fn registry() -> Registry {
    parse_registry(&load_fixture("registry")).unwrap()
}

fn blacklisting(names: &[&str]) -> GeneratorConfig {
    GeneratorConfig {
        blacklist: BlacklistConfig {
            names: names.iter().map(|n| n.to_string()).collect(),
            file: None,
        },
        ..Default::default()
    }
}

fn run(registry: &Registry, config: &GeneratorConfig, kind: BackendKind) -> Artifact {
    let domain = config.domain(registry);
    generate(&domain, kind.create(config), &config.output_options()).unwrap()
}

fn run_all(registry: &Registry, config: &GeneratorConfig) -> Vec<Artifact> {
    BackendKind::ALL
        .into_iter()
        .map(|kind| run(registry, config, kind))
        .collect()
}

// === Scenarios ===

#[test]
fn aliased_enum_and_guarded_command() {
    let registry = registry();
    let config = GeneratorConfig::default();

    let decoder = run(&registry, &config, BackendKind::DecoderBody);
    assert!(decoder.text.contains(
        "#ifdef EXT1_ENABLED\n    case format::ApiCallId::ApiCall_DoThing:\n        \
         Decode_DoThing(call_info, parameter_buffer, buffer_size);\n        break;\n#endif // EXT1_ENABLED\n"
    ));
    assert!(
        decoder
            .text
            .contains("#ifdef EXT1_ENABLED\nsize_t VulkanDecoder::Decode_DoThing(")
    );

    let serializer = run(&registry, &config, BackendKind::EnumJsonHeader);
    assert_eq!(serializer.text.matches("const Color& value").count(), 1);
    assert!(!serializer.text.contains("Color2"));
    assert!(!serializer.text.contains("EXT1_ENABLED"));
}

#[test]
fn enum_serializer_header() {
    let artifact = run(&registry(), &GeneratorConfig::default(), BackendKind::EnumJsonHeader);
    assert_eq!(artifact.file_name, "generated_vulkan_enum_to_json.h");
    insta::assert_snapshot!(artifact.text);
}

#[test]
fn blacklisted_command_leaves_no_guard() {
    let registry = registry();
    let config = blacklisting(&["DoThing"]);

    for kind in [BackendKind::DecoderBody, BackendKind::ConsumerHeader] {
        let artifact = run(&registry, &config, kind);
        assert!(!artifact.text.contains("DoThing"), "{kind}");
        assert!(!artifact.text.contains("EXT1_ENABLED"), "{kind}");
        assert!(artifact.text.contains("BindImage"), "{kind}");
    }
}

#[test]
fn wide_flags_get_exactly_one_marker() {
    let artifact = run(&registry(), &GeneratorConfig::default(), BackendKind::EnumJsonHeader);
    let text = &artifact.text;
    assert_eq!(text.matches("struct Mask64_t { };").count(), 1);
    assert_eq!(text.matches("FieldToJson(Mask64_t, ").count(), 1);
    assert_eq!(text.matches("const VkFlags64 flags").count(), 1);
    assert!(!text.contains("Mask32_t"));
    assert!(text.contains("FieldToJson(nlohmann::ordered_json& jdata, const Mask32 flags"));
    assert!(!text.contains("Color_t"));

    // The bits enum of a wide flags type is marked too; narrow ones are not.
    assert_eq!(text.matches("struct Mask64Bits_t { };").count(), 1);
    assert!(text.contains("FieldToJson(Mask64Bits_t, nlohmann::ordered_json& jdata, "));
    assert!(!text.contains("Mask32Bits_t"));
}

#[test]
fn wide_bits_enums_do_not_share_an_overload() {
    let bits = |name: &str, bit| EnumDef {
        values: vec![EnumValue::bit(format!("{name}_HIGH"), bit)],
    };
    let wide = |bits_enum: &str| FlagsDef {
        bits_enum: Some(bits_enum.into()),
        base_type: Some("VkFlags64".into()),
    };
    let registry = Registry::builder()
        .enum_def("StageBits2", bits("STAGE", 40))
        .enum_def("AccessBits2", bits("ACCESS", 41))
        .alias(EntityKind::Enum, "StageBits2KHR", "StageBits2")
        .flags("Stage2", wide("StageBits2"))
        .flags("Access2", wide("AccessBits2"))
        .feature(Feature::new("v1", 1, &["StageBits2", "Stage2"]))
        .extension(Extension::new("ext1", &["StageBits2KHR", "AccessBits2", "Access2"]))
        .build()
        .unwrap();
    let text = run(&registry, &GeneratorConfig::default(), BackendKind::EnumJsonHeader).text;

    for name in ["StageBits2", "AccessBits2", "Stage2", "Access2"] {
        assert_eq!(text.matches(&format!("struct {name}_t {{ }};")).count(), 1, "{name}");
    }
    for name in ["StageBits2", "AccessBits2"] {
        assert!(text.contains(&format!(
            "void FieldToJson({name}_t, nlohmann::ordered_json& jdata, const {name}& value, "
        )));
        assert!(!text.contains(&format!(
            "void FieldToJson(nlohmann::ordered_json& jdata, const {name}& value"
        )));
    }
    assert!(!text.contains("StageBits2KHR"));
}

#[test]
fn extensions_follow_their_prerequisites() {
    let artifact = run(&registry(), &GeneratorConfig::default(), BackendKind::ObjectInfoTable);
    let text = &artifact.text;
    let device = text.find("AddVkDeviceInfo").unwrap();
    let image = text.find("#ifdef EXTA_ENABLED\n    void AddVkImageInfo").unwrap();
    let sampler = text.find("#ifdef EXTB_ENABLED\n    void AddVkSamplerInfo").unwrap();
    assert!(device < image && image < sampler);

    // Listing order does not matter.
    for listing in [["extA", "extB"], ["extB", "extA"]] {
        let mut builder = Registry::builder().command("CmdA", vec![]).command("CmdB", vec![]);
        for name in listing {
            let ext = match name {
                "extA" => Extension::new("extA", &["CmdA"]),
                _ => Extension::new("extB", &["CmdB"]).requires(&["extA"]),
            };
            builder = builder.extension(ext);
        }
        let registry = builder.build().unwrap();
        let text = run(&registry, &GeneratorConfig::default(), BackendKind::ConsumerHeader).text;
        assert!(text.find("Process_CmdA").unwrap() < text.find("Process_CmdB").unwrap());
    }
}

#[test]
fn features_in_ordinal_order() {
    let text = run(&registry(), &GeneratorConfig::default(), BackendKind::EnumJsonHeader).text;
    let color = text.find("const Color& value").unwrap();
    assert!(color < text.find("const Mask64Bits& value").unwrap());
}

// === Properties ===

#[test]
fn output_is_deterministic() {
    let registry = registry();
    let config = blacklisting(&["Foo"]);
    assert_eq!(run_all(&registry, &config), run_all(&registry, &config));
}

#[test]
fn parallel_runs_match_sequential_runs() {
    let registry = registry();
    let config = GeneratorConfig::default();
    let domain = config.domain(&registry);
    let backends = BackendKind::ALL
        .into_iter()
        .map(|kind| kind.create(&config))
        .collect();
    let parallel: Vec<Artifact> = generate_all(&domain, backends, &config.output_options())
        .into_iter()
        .map(Result::unwrap)
        .collect();
    assert_eq!(parallel, run_all(&registry, &config));
}

#[test]
fn blacklist_reaches_aliases_and_references() {
    let registry = registry();

    // `Color2` aliases `Color`; `DoThing` and `BindImage` take a `Color`.
    let config = blacklisting(&["Color"]);
    for artifact in run_all(&registry, &config) {
        for name in ["Color", "DoThing", "BindImage"] {
            assert!(!artifact.text.contains(name), "{} in {}", name, artifact.backend);
        }
    }

    // `ImageBinding` holds a `VkImage`; `BindImage` takes an `ImageBinding`.
    let config = blacklisting(&["VkImage"]);
    for artifact in run_all(&registry, &config) {
        for name in ["VkImage", "ImageBinding", "BindImage", "EXTA_ENABLED"] {
            assert!(!artifact.text.contains(name), "{} in {}", name, artifact.backend);
        }
    }
}

#[test]
fn guards_are_balanced_and_never_empty() {
    let registry = registry();
    for artifact in run_all(&registry, &GeneratorConfig::default()) {
        let text = &artifact.text;
        for guard in ["EXT1_ENABLED", "EXTA_ENABLED", "EXTB_ENABLED"] {
            assert_eq!(
                text.matches(&format!("#ifdef {guard}\n")).count(),
                text.matches(&format!("#endif // {guard}\n")).count(),
                "{} in {}",
                guard,
                artifact.backend
            );
            assert!(
                !text.contains(&format!("#ifdef {guard}\n#endif // {guard}\n")),
                "empty {} in {}",
                guard,
                artifact.backend
            );
        }
    }
}

#[test]
fn guarded_features_skip_blocks_without_output() {
    let registry = Registry::builder()
        .enumeration("Color", &["RED"])
        .command("CmdA", vec![Member::value("color", "Color")])
        .feature(Feature::new("v1", 1, &["Color"]).with_protect("V1_GUARD"))
        .feature(Feature::new("v2", 2, &["CmdA"]).with_protect("V2_GUARD"))
        .build()
        .unwrap();
    let config = GeneratorConfig::default();
    let text = run(&registry, &config, BackendKind::ConsumerHeader).text;

    assert!(text.contains("#ifdef V2_GUARD\n    virtual void Process_CmdA("));
    assert!(text.contains("Color color) {}\n#endif // V2_GUARD\n"));
    assert!(!text.contains("V1_GUARD"));

    let serializer = run(&registry, &config, BackendKind::EnumJsonHeader).text;
    assert!(serializer.contains("#ifdef V1_GUARD\nvoid FieldToJson("));
    assert!(!serializer.contains("V2_GUARD"));
}

#[test]
fn disabling_feature_protection_drops_every_block_guard() {
    let registry = registry();
    let config = GeneratorConfig {
        protect_feature: false,
        ..Default::default()
    };
    for artifact in run_all(&registry, &config) {
        assert!(!artifact.text.contains("#ifdef"), "{}", artifact.backend);
        assert!(!artifact.text.contains("#endif"), "{}", artifact.backend);
    }

    let decoder = run(&registry, &config, BackendKind::DecoderBody).text;
    assert!(decoder.contains("size_t VulkanDecoder::Decode_DoThing("));
    assert!(decoder.contains("    case format::ApiCallId::ApiCall_DoThing:\n"));
}

#[test]
fn wrappers_cover_handle_bearing_structs() {
    let config = GeneratorConfig::default();
    let artifact = run(&registry(), &config, BackendKind::StructHandleWrappers);
    assert_eq!(artifact.file_name, "generated_vulkan_struct_handle_wrappers.h");
    assert_eq!(artifact.kind, ArtifactKind::Header);

    let text = &artifact.text;
    assert!(text.contains("namespace encode {\nnamespace vulkan_wrappers {\n"));
    assert!(text.contains(
        "#ifdef EXTA_ENABLED\n\
         void UnwrapStructHandles(ImageBinding* value, HandleUnwrapMemory* unwrap_memory);\n\
         #endif // EXTA_ENABLED\n"
    ));
    assert!(!text.contains("UnwrapStructHandles(Foo*"));
    let body_end = text.find("#endif // EXTA_ENABLED").unwrap();
    assert!(body_end < text.find("MakeUnwrapStructs").unwrap());
}

/// Records every entity handed to `emit`.
struct Recorder {
    seen: Arc<Mutex<Vec<String>>>,
}

impl Backend for Recorder {
    fn name(&self) -> &'static str {
        "recorder"
    }

    fn artifact_kind(&self) -> ArtifactKind {
        ArtifactKind::Header
    }

    fn file_stem(&self) -> String {
        "recorded".into()
    }

    fn declared_headers(&self) -> Vec<Include> {
        Vec::new()
    }

    fn namespace_tokens(&self) -> Vec<String> {
        Vec::new()
    }

    fn relevant_kinds(&self) -> &'static [EntityKind] {
        &EntityKind::ALL
    }

    fn emit(&mut self, _: &Domain<'_>, _: Block<'_>, entity: &Entity) -> Result<String, Error> {
        self.seen.lock().unwrap().push(entity.name.clone());
        Ok(format!("// {}\n", entity.name))
    }
}

#[test]
fn backends_only_see_canonical_entities_once() {
    let registry = Registry::builder()
        .enumeration("Color", &["RED"])
        .alias(EntityKind::Enum, "Color2", "Color")
        .command("DoThing", vec![Member::value("color", "Color2")])
        .alias(EntityKind::Command, "DoThingKHR", "DoThing")
        .feature(Feature::new("v1", 1, &["Color2"]))
        .extension(Extension::new("extA", &["Color", "DoThingKHR"]))
        .extension(Extension::new("extB", &["Color2", "DoThing", "DoThingKHR"]))
        .build()
        .unwrap();
    let config = GeneratorConfig::default();
    let domain = config.domain(&registry);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = Recorder {
        seen: Arc::clone(&seen),
    };
    let artifact = generate(&domain, Box::new(recorder), &config.output_options()).unwrap();

    assert_eq!(*seen.lock().unwrap(), ["Color", "DoThing"]);
    assert_eq!(artifact.file_name, "recorded.h");
    assert_eq!(artifact.text, "// Color\n\n// DoThing\n");
}

#[test]
fn alias_only_blocks_produce_nothing() {
    let registry = Registry::builder()
        .enumeration("Color", &["RED"])
        .alias(EntityKind::Enum, "Color2", "Color")
        .alias(EntityKind::Enum, "Color3", "Color")
        .feature(Feature::new("v1", 1, &["Color"]))
        .extension(Extension::new("extA", &["Color2"]).with_protect("EXTA"))
        .extension(Extension::new("extB", &["Color3", "Color2"]).with_protect("EXTB"))
        .build()
        .unwrap();
    let text = run(&registry, &GeneratorConfig::default(), BackendKind::EnumJsonHeader).text;
    assert_eq!(text.matches("FieldToJson(").count(), 1);
    assert!(!text.contains("#ifdef"));
}

#[test]
fn empty_registry_is_structurally_valid() {
    let registry = Registry::builder().build().unwrap();
    let config = GeneratorConfig {
        protect_file: true,
        ..Default::default()
    };
    let artifact = run(&registry, &config, BackendKind::ConsumerHeader);
    assert_eq!(
        artifact.text,
        "#ifndef GENERATED_VULKAN_CONSUMER_H\n#define GENERATED_VULKAN_CONSUMER_H\n\n\
         #include \"decode/vulkan_consumer_base.h\"\n#include \"util/defines.h\"\n\n\
         namespace gfxrecon {\nnamespace decode {\n\n\
         class VulkanConsumer : public VulkanConsumerBase\n{\n  public:\n    VulkanConsumer() {}\n\n    \
         virtual ~VulkanConsumer() {}\n\n\
         };\n\n\
         } // namespace decode\n} // namespace gfxrecon\n\n\
         #endif // GENERATED_VULKAN_CONSUMER_H\n"
    );
}

// === Errors ===

fn windowing_registry() -> Registry {
    Registry::builder()
        .command("CreateSurface", vec![Member::value("hwnd", "HWND")])
        .platform_type("HWND", "win32")
        .extension(
            Extension::new("ext_win32", &["CreateSurface"])
                .with_platform("win32")
                .with_protect("VK_USE_PLATFORM_WIN32_KHR"),
        )
        .build()
        .unwrap()
}

#[test]
fn missing_platform_mapping_aborts_the_run() {
    let registry = windowing_registry();
    let config = GeneratorConfig::default();
    let domain: Domain<'_> = config.domain(&registry);
    let err = generate(
        &domain,
        BackendKind::DecoderBody.create(&config),
        &config.output_options(),
    )
    .unwrap_err();

    assert_eq!(err.block_kind, BlockKind::Extension);
    assert_eq!(err.block, "ext_win32");
    assert_eq!(err.entity, "CreateSurface");
    assert_eq!(err.kind, Some(EntityKind::Command));
    assert_eq!(
        err.source,
        Error::MissingPlatformMapping {
            type_name: "HWND".into(),
            platform: "win32".into()
        }
    );
    assert!(err.to_string().contains("CreateSurface"));
}

#[test]
fn platform_overrides_pull_in_platform_headers() {
    let registry = windowing_registry();
    let mut config = GeneratorConfig::from_toml_str(
        "platform_headers = [\"<windows.h>\"]\n\n[platform_types.HWND]\nwin32 = \"uint64_t\"\n",
    )
    .unwrap();
    let text = run(&registry, &config, BackendKind::DecoderBody).text;
    assert!(text.contains("    uint64_t hwnd;\n"));
    assert!(text.contains("#include <windows.h>\n"));

    // No platform types emitted, no platform headers.
    config.blacklist.names.push("CreateSurface".into());
    let text = run(&registry, &config, BackendKind::DecoderBody).text;
    assert!(!text.contains("windows.h"));
}

#[test]
fn broken_alias_names_the_alias() {
    let registry = Registry::builder()
        .alias(EntityKind::Struct, "FooKHR", "Foo")
        .feature(Feature::new("v1", 1, &["FooKHR"]))
        .build()
        .unwrap();
    let config = GeneratorConfig::default();
    let domain = config.domain(&registry);
    let err = generate(
        &domain,
        BackendKind::ConsumerHeader.create(&config),
        &config.output_options(),
    )
    .unwrap_err();
    assert_eq!(err.block_kind, BlockKind::Feature);
    assert_eq!(err.entity, "FooKHR");
    assert!(matches!(err.source, Error::BrokenAlias { .. }));
}
