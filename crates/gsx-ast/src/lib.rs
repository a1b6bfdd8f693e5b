//! Abstract syntax tree definitions for the GSX hybrid templating DSL.
//!
//! This crate defines the node types produced by the parser and consumed by
//! every downstream layer: the symbol index, the cursor resolver, the host
//! proxy's virtual-file generator, and the providers.

pub mod ast;

pub use ast::{
    AttrValue, Attribute, ChildNode, ChildrenSlot, Comment, CommentGroup, Component, CompCall,
    Element, ElementLayout, File, ForStmt, HostCode, HostDecl, HostDeclKind, HostExpr,
    HostFunction, IfBranch, IfStmt, Import, LetBinding, Param, ParseOutput, Receiver, Span, Text,
    TopLevelItem,
};
