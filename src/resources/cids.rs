//! CID (disease classification) lookups.

// self
use crate::{_prelude::*, client::ApiClient, http::ApiTransport, resources::path_segment};

/// CID code and its description.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cid {
	/// Classification code, e.g. `A00`.
	pub code: String,
	/// Human-readable description.
	pub description: String,
}

#[derive(Deserialize)]
struct CidEnvelope {
	cid: Cid,
}

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Looks up a CID by code; an unknown code surfaces as a 404 [`Error::Api`].
	pub async fn find_cid(&self, code: &str) -> Result<Cid> {
		let code = path_segment(code)?;
		let CidEnvelope { cid } = self.get(&format!("/cids/{code}")).await?;

		Ok(cid)
	}
}
