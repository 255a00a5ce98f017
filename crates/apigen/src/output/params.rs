//! Parameter classification shared by the decoder body and consumer header,
//! so a decoded local and the consumer parameter it is passed to always agree.

use crate::domain::{Domain, TypeClass};
use crate::error::Error;
use crate::ir::{Entity, Member};

/// Read position arguments passed to every decode call.
const CURSOR: &str = "(parameter_buffer + bytes_read), (buffer_size - bytes_read)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Shape {
    Value,
    Enum,
    Flags,
    Handle,
    HandleArray,
    String,
    Struct,
    StructArray,
    Pointer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Param {
    pub name: String,
    /// Canonical, platform-resolved base type.
    pub token: String,
    pub shape: Shape,
}

/// A command's return value (if any) followed by its parameters.
pub(crate) fn params_of(domain: &Domain<'_>, command: &Entity) -> Result<Vec<Param>, Error> {
    let Some(def) = command.as_command() else {
        return Ok(Vec::new());
    };
    let mut params = Vec::with_capacity(def.params.len() + 1);
    if let Some(ret) = def.returns() {
        params.push(classify(domain, command, &Member::value("return_value", ret))?);
    }
    for member in &def.params {
        params.push(classify(domain, command, member)?);
    }
    Ok(params)
}

pub(crate) fn classify(
    domain: &Domain<'_>,
    owner: &Entity,
    member: &Member,
) -> Result<Param, Error> {
    let token = domain.type_token(owner, &member.ty)?;
    let shape = match (domain.classify(&member.ty)?, member.pointer) {
        (TypeClass::Handle, false) => Shape::Handle,
        (TypeClass::Handle, true) => Shape::HandleArray,
        (TypeClass::Struct, false) => Shape::Struct,
        (TypeClass::Struct, true) => Shape::StructArray,
        (TypeClass::Enum, false) => Shape::Enum,
        (TypeClass::Flags, false) => Shape::Flags,
        (TypeClass::Opaque, true) if member.ty == "char" => Shape::String,
        (_, true) => Shape::Pointer,
        (TypeClass::Opaque, false) => Shape::Value,
    };
    Ok(Param {
        name: member.name.clone(),
        token,
        shape,
    })
}

impl Param {
    /// Type of the local the decoder decodes into.
    pub(crate) fn decoded_type(&self) -> String {
        let token = &self.token;
        match self.shape {
            Shape::Value | Shape::Enum | Shape::Flags => token.clone(),
            Shape::Handle => "format::HandleId".to_string(),
            Shape::HandleArray => format!("HandlePointerDecoder<{token}>"),
            Shape::String => "StringDecoder".to_string(),
            Shape::Struct => format!("Decoded_{token}"),
            Shape::StructArray => format!("StructPointerDecoder<Decoded_{token}>"),
            Shape::Pointer => format!("PointerDecoder<{token}>"),
        }
    }

    /// Type of the matching consumer `Process_*` parameter.
    pub(crate) fn consumer_type(&self) -> String {
        match self.shape {
            Shape::Value | Shape::Enum | Shape::Flags | Shape::Handle => self.decoded_type(),
            Shape::Struct => format!("const {}&", self.decoded_type()),
            _ => format!("{}*", self.decoded_type()),
        }
    }

    /// Expression passing the decoded local to a consumer.
    pub(crate) fn argument(&self) -> String {
        match self.shape {
            Shape::Value | Shape::Enum | Shape::Flags | Shape::Handle | Shape::Struct => {
                self.name.clone()
            }
            _ => format!("&{}", self.name),
        }
    }

    pub(crate) fn decode_statement(&self) -> String {
        let name = &self.name;
        let value_decoder = |function: &str| {
            format!("bytes_read += ValueDecoder::{function}({CURSOR}, &{name});")
        };
        match self.shape {
            Shape::Value => value_decoder("DecodeValue"),
            Shape::Enum => value_decoder("DecodeEnumValue"),
            Shape::Flags => value_decoder("DecodeFlagsValue"),
            Shape::Handle => value_decoder("DecodeHandleIdValue"),
            Shape::Struct => format!("bytes_read += DecodeStruct({CURSOR}, &{name});"),
            _ => format!("bytes_read += {name}.Decode({CURSOR});"),
        }
    }
}
