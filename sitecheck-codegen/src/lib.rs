use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::{quote, quote_spanned};
use syn::spanned::Spanned;

/// Turns `async fn name(configuration: HarnessConfiguration) -> Result<(), E>` into a `#[test]`.
///
/// The optional argument names a `fn(&mut HarnessConfiguration)` applied to the configuration
/// loaded from the environment before the scenario starts. The scenario runs on a
/// current-thread runtime and the test fails with the `Display` of the returned error.
#[proc_macro_attribute]
pub fn scenario_test(attrs: TokenStream, item: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(item as syn::ItemFn);
    let args = syn::parse_macro_input!(attrs as syn::AttributeArgs);

    if let Err(stream) = validate_signature(&input.sig) {
        return stream.into();
    }

    let configure = match configuration_function(&args) {
        Ok(configure) => configure,
        Err(stream) => return stream.into(),
    };

    let attributes = &input.attrs;
    let visibility = &input.vis;
    let test_name = &input.sig.ident;
    let block = &input.block;

    let mut scenario_signature = input.sig.clone();
    scenario_signature.ident = syn::Ident::new("__sitecheck_scenario", Span::call_site());

    let output = quote! {
        #(#attributes)*
        #[test]
        #visibility fn #test_name() {
            #scenario_signature #block

            ::sitecheck::logging::init();

            #[allow(unused_mut)]
            let mut __sitecheck_configuration = match ::sitecheck::HarnessConfiguration::from_env() {
                Ok(configuration) => configuration,
                Err(e) => panic!("Invalid configuration: {}", e),
            };
            #configure

            let __sitecheck_runtime = match ::sitecheck::__private::tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => panic!("Unable to start the scenario runtime: {}", e),
            };

            if let Err(e) = __sitecheck_runtime.block_on(__sitecheck_scenario(__sitecheck_configuration)) {
                panic!("Scenario failed: {}", e);
            }
        }
    };

    TokenStream::from(output)
}

fn validate_signature(signature: &syn::Signature) -> Result<(), proc_macro2::TokenStream> {
    if signature.asyncness.is_none() {
        return Err(quote_spanned! {signature.fn_token.span()=>
            compile_error!("A scenario should be an async function!");
        });
    }

    if signature.inputs.len() != 1 {
        return Err(quote_spanned! {signature.inputs.span()=>
            compile_error!("A scenario should take exactly one argument: the HarnessConfiguration");
        });
    }

    Ok(())
}

fn configuration_function(
    args: &[syn::NestedMeta],
) -> Result<proc_macro2::TokenStream, proc_macro2::TokenStream> {
    match args {
        [] => Ok(proc_macro2::TokenStream::new()),
        [syn::NestedMeta::Meta(syn::Meta::Path(function_path))] => Ok(quote! {
            #function_path(&mut __sitecheck_configuration);
        }),
        [other] => Err(quote_spanned! {other.span()=>
            compile_error!("The argument should be a configuration function!");
        }),
        [_, extra, ..] => Err(quote_spanned! {extra.span()=>
            compile_error!("Only a configuration function can be passed to the macro");
        }),
    }
}
