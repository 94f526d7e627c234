//! Side-effect classification
//!
//! A node is pure when evaluating it, or skipping it, cannot be observed by
//! other code. The classification is a conservative whitelist: declarations,
//! function and class values, identifiers and literals are pure; variable
//! declarations, object and array literals recurse into their parts;
//! everything else (calls, assignments, member access, `new`, ...) is impure.

use oxc_ast::ast::{
    ArrayExpressionElement, Declaration, ExportDefaultDeclarationKind, Expression,
    ObjectPropertyKind, Program, Statement, VariableDeclaration,
};

/// `true` if no top-level statement of the module has an observable effect
pub fn is_pure_module(program: &Program<'_>) -> bool {
    program.body.iter().all(is_pure_statement)
}

pub fn is_pure_statement(stmt: &Statement<'_>) -> bool {
    match stmt {
        Statement::ImportDeclaration(_)
        | Statement::ExportAllDeclaration(_)
        | Statement::EmptyStatement(_)
        | Statement::DebuggerStatement(_)
        | Statement::FunctionDeclaration(_)
        | Statement::ClassDeclaration(_)
        | Statement::TSTypeAliasDeclaration(_)
        | Statement::TSInterfaceDeclaration(_) => true,
        Statement::VariableDeclaration(decl) => is_pure_variable_declaration(decl),
        Statement::ExpressionStatement(stmt) => is_pure_expression(&stmt.expression),
        Statement::ExportNamedDeclaration(export) => {
            export.declaration.as_ref().is_none_or(is_pure_declaration)
        }
        Statement::ExportDefaultDeclaration(export) => is_pure_export_default(&export.declaration),
        _ => false,
    }
}

pub fn is_pure_declaration(decl: &Declaration<'_>) -> bool {
    match decl {
        Declaration::VariableDeclaration(decl) => is_pure_variable_declaration(decl),
        Declaration::FunctionDeclaration(_)
        | Declaration::ClassDeclaration(_)
        | Declaration::TSTypeAliasDeclaration(_)
        | Declaration::TSInterfaceDeclaration(_) => true,
        _ => false,
    }
}

pub fn is_pure_variable_declaration(decl: &VariableDeclaration<'_>) -> bool {
    decl.declarations
        .iter()
        .all(|declarator| declarator.init.as_ref().is_none_or(is_pure_expression))
}

pub fn is_pure_export_default(kind: &ExportDefaultDeclarationKind<'_>) -> bool {
    match kind {
        ExportDefaultDeclarationKind::FunctionDeclaration(_)
        | ExportDefaultDeclarationKind::ClassDeclaration(_)
        | ExportDefaultDeclarationKind::TSInterfaceDeclaration(_) => true,
        other => other.as_expression().is_some_and(is_pure_expression),
    }
}

pub fn is_pure_expression(expr: &Expression<'_>) -> bool {
    match expr {
        Expression::BooleanLiteral(_)
        | Expression::NullLiteral(_)
        | Expression::NumericLiteral(_)
        | Expression::BigIntLiteral(_)
        | Expression::StringLiteral(_)
        | Expression::RegExpLiteral(_)
        | Expression::Identifier(_)
        | Expression::ArrowFunctionExpression(_)
        | Expression::FunctionExpression(_)
        | Expression::ClassExpression(_) => true,
        // Interpolation may call user-defined toString
        Expression::TemplateLiteral(template) => template.expressions.is_empty(),
        Expression::ParenthesizedExpression(paren) => is_pure_expression(&paren.expression),
        Expression::ObjectExpression(object) => object.properties.iter().all(|prop| match prop {
            ObjectPropertyKind::SpreadProperty(spread) => is_pure_expression(&spread.argument),
            ObjectPropertyKind::ObjectProperty(prop) => {
                let key_pure = !prop.computed || prop.key.as_expression().is_none_or(is_pure_expression);
                key_pure && is_pure_expression(&prop.value)
            }
        }),
        Expression::ArrayExpression(array) => array.elements.iter().all(|element| match element {
            ArrayExpressionElement::SpreadElement(spread) => is_pure_expression(&spread.argument),
            ArrayExpressionElement::Elision(_) => true,
            other => other.as_expression().is_some_and(is_pure_expression),
        }),
        _ => false,
    }
}
