//! Decoder implementation: one `Decode_*` routine per command and the
//! aggregate `DecodeFunctionCall` dispatch over all of them.

use super::params::params_of;
use super::{ApiNaming, snake_case};
use crate::compose::{Include, join_guarded};
use crate::domain::Domain;
use crate::error::Error;
use crate::ir::{Entity, EntityKind};
use crate::traits::{ArtifactKind, Backend, Block};
use std::fmt::Write;

/// Decoder body options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderBodyOptions {
    pub naming: ApiNaming,
    pub class_name: String,
    pub base_class: String,
}

impl DecoderBodyOptions {
    pub fn new(naming: ApiNaming) -> Self {
        Self {
            class_name: format!("{}Decoder", naming.api_prefix),
            base_class: format!("{}DecoderBase", naming.api_prefix),
            naming,
        }
    }
}

impl Default for DecoderBodyOptions {
    fn default() -> Self {
        Self::new(ApiNaming::default())
    }
}

pub struct DecoderBodyBackend {
    options: DecoderBodyOptions,
    /// Dispatch cases in emission order, with the guard of their block.
    cases: Vec<(Option<String>, String)>,
}

impl DecoderBodyBackend {
    pub fn new(options: DecoderBodyOptions) -> Self {
        Self {
            options,
            cases: Vec::new(),
        }
    }
}

impl Backend for DecoderBodyBackend {
    fn name(&self) -> &'static str {
        "decoder-body"
    }

    fn artifact_kind(&self) -> ArtifactKind {
        ArtifactKind::Body
    }

    fn file_stem(&self) -> String {
        format!("generated_{}", snake_case(&self.options.class_name))
    }

    fn declared_headers(&self) -> Vec<Include> {
        let lower = self.options.naming.lower();
        let stem = self.file_stem();
        vec![
            Include::local("decode/handle_pointer_decoder.h"),
            Include::local("decode/pointer_decoder.h"),
            Include::local("decode/string_array_decoder.h"),
            Include::local("decode/string_decoder.h"),
            Include::local("decode/struct_pointer_decoder.h"),
            Include::local("decode/value_decoder.h"),
            Include::local(format!("decode/{lower}_pnext_node.h")),
            Include::local(format!("generated/{stem}.h")),
            Include::local(format!("generated/generated_{lower}_struct_decoders_forward.h")),
            Include::local("util/defines.h"),
            Include::system("cstddef"),
        ]
    }

    fn namespace_tokens(&self) -> Vec<String> {
        self.options.naming.namespaces_with("decode")
    }

    fn relevant_kinds(&self) -> &'static [EntityKind] {
        &[EntityKind::Command]
    }

    fn emit(
        &mut self,
        domain: &Domain<'_>,
        block: Block<'_>,
        entity: &Entity,
    ) -> Result<String, Error> {
        let class = &self.options.class_name;
        let command = &entity.name;
        let params = params_of(domain, entity)?;

        let mut out = format!(
            "size_t {class}::Decode_{command}(const ApiCallInfo& call_info, \
             const uint8_t* parameter_buffer, size_t buffer_size)\n{{\n    \
             size_t bytes_read = 0;\n"
        );
        if !params.is_empty() {
            out.push('\n');
            for param in &params {
                let _ = writeln!(out, "    {} {};", param.decoded_type(), param.name);
            }
            out.push('\n');
            // The return value is recorded after the parameters.
            let returns = entity.as_command().and_then(|c| c.returns()).is_some();
            let (ret, rest) = params.split_at(usize::from(returns));
            for param in rest.iter().chain(ret) {
                let _ = writeln!(out, "    {}", param.decode_statement());
            }
        }

        let args: String = params
            .iter()
            .map(|param| format!(", {}", param.argument()))
            .collect();
        let _ = write!(
            out,
            "\n    for (auto consumer : GetConsumers())\n    {{\n        \
             consumer->Process_{command}(call_info{args});\n    }}\n\n    \
             return bytes_read;\n}}\n"
        );

        self.cases.push((
            block.guard.map(str::to_string),
            format!(
                "    case format::ApiCallId::ApiCall_{command}:\n        \
                 Decode_{command}(call_info, parameter_buffer, buffer_size);\n        \
                 break;\n"
            ),
        ));
        Ok(out)
    }

    fn trailer(&mut self) -> String {
        let DecoderBodyOptions {
            class_name,
            base_class,
            ..
        } = &self.options;
        let cases = join_guarded(&self.cases);
        format!(
            "void {class_name}::DecodeFunctionCall(format::ApiCallId call_id,\n    \
             const ApiCallInfo& call_info,\n    \
             const uint8_t* parameter_buffer,\n    \
             size_t buffer_size)\n{{\n    \
             switch (call_id)\n    {{\n    \
             default:\n        \
             {base_class}::DecodeFunctionCall(call_id, call_info, parameter_buffer, buffer_size);\n        \
             break;\n\
             {cases}    }}\n}}\n"
        )
    }
}
