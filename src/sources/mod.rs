//! Token sources. Sentinel Hub issues tokens through the OAuth2 client-credentials grant only.

pub mod oauth2;
